pub struct Icons;

impl Icons {
    pub const TOOTH: &str = "🦷";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const DATABASE: &str = "🗄️";
    pub const FILE: &str = "📄";
    pub const STATS: &str = "📊";
    pub const CHART: &str = "📈";
    pub const GEAR: &str = "⚙️";
}
