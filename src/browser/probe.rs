use std::time::{Duration, Instant};

const SUCCESS_HOLD: Duration = Duration::from_secs(3);
const FAILURE_HOLD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeStatus {
    #[default]
    Idle,
    Testing,
    Connected(Instant),
    Failed(Instant),
}

/// "Test Connection" 按钮的状态
#[derive(Debug, Default)]
pub struct ConnectionProbe {
    status: ProbeStatus,
}

impl ConnectionProbe {
    pub fn status(&self) -> ProbeStatus {
        self.status
    }

    /// 测试中再次触发返回 false
    pub fn begin(&mut self) -> bool {
        if self.status == ProbeStatus::Testing {
            return false;
        }
        self.status = ProbeStatus::Testing;
        true
    }

    pub fn finish(&mut self, ok: bool, now: Instant) {
        self.status = if ok {
            ProbeStatus::Connected(now)
        } else {
            ProbeStatus::Failed(now)
        };
    }

    /// 结果显示一段时间后恢复初始状态
    pub fn expire(&mut self, now: Instant) {
        let expired = match self.status {
            ProbeStatus::Connected(at) => now.duration_since(at) >= SUCCESS_HOLD,
            ProbeStatus::Failed(at) => now.duration_since(at) >= FAILURE_HOLD,
            _ => false,
        };
        if expired {
            self.status = ProbeStatus::Idle;
        }
    }

    pub fn label(&self) -> &'static str {
        match self.status {
            ProbeStatus::Idle => "Test Connection",
            ProbeStatus::Testing => "Testing...",
            ProbeStatus::Connected(_) => "Connected",
            ProbeStatus::Failed(_) => "Failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_probe_lifecycle() {
        let mut p = ConnectionProbe::default();
        assert_eq!(p.label(), "Test Connection");
        assert!(p.begin());
        assert_eq!(p.label(), "Testing...");
        assert!(!p.begin());

        let t0 = Instant::now();
        p.finish(true, t0);
        assert_eq!(p.label(), "Connected");
        p.expire(t0 + Duration::from_secs(2));
        assert_eq!(p.label(), "Connected");
        p.expire(t0 + Duration::from_secs(3));
        assert_eq!(p.label(), "Test Connection");
    }

    #[test]
    fn failure_is_shown_longer() {
        let mut p = ConnectionProbe::default();
        p.begin();
        let t0 = Instant::now();
        p.finish(false, t0);
        p.expire(t0 + Duration::from_secs(4));
        assert_eq!(p.label(), "Failed");
        p.expire(t0 + Duration::from_secs(5));
        assert_eq!(p.status(), ProbeStatus::Idle);
    }
}
