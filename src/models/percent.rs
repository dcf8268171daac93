// Derived percentage that may not be computable yet

use serde::{Deserialize, Serialize};
use std::fmt;

/// A derived percentage in `[0, 100]`.
///
/// `Pending` means "not yet computable": rate-based values need a previous
/// sample, and `rss_p` needs the host memory total. On the wire it reads as `0`,
/// so a pending value must not be taken as a real zero reading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum Percent {
    #[default]
    Pending,
    Ready(f64),
}

impl Percent {
    pub fn value(self) -> f64 {
        match self {
            Percent::Pending => 0.0,
            Percent::Ready(v) => v,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Percent::Pending)
    }
}

impl From<f64> for Percent {
    fn from(v: f64) -> Self {
        Percent::Ready(v)
    }
}

impl From<Percent> for f64 {
    fn from(p: Percent) -> Self {
        p.value()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Percent::Pending => f.write_str("n/a"),
            Percent::Ready(v) => write!(f, "{:.2}%", v),
        }
    }
}
