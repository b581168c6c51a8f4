/// How the mock upstream answers a chat request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpstreamBehavior {
    /// Stream the last user turn straight back
    #[default]
    Echo,

    /// Like `Echo`, with a pause before every frame
    Slow,

    /// Answer every request with 503 Service Unavailable
    Fail,
}

impl UpstreamBehavior {
    /// Parse behavior from a command-line string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "echo" => Some(Self::Echo),
            "slow" => Some(Self::Slow),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Echo => "echo",
            Self::Slow => "slow",
            Self::Fail => "fail",
        }
    }

    /// Whether frames are spaced out in time
    pub fn is_delayed(&self) -> bool {
        matches!(self, Self::Slow)
    }
}
