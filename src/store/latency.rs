use std::time::Duration;

/// Artificial delays applied before each store operation resolves.
///
/// The defaults reproduce the response times the admin UI was built
/// against. There is no retry or cancellation attached to the wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Latency {
    pub list: Duration,
    pub get: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
    pub analytics: Duration,
}

impl Latency {
    pub const fn none() -> Self {
        Self {
            list: Duration::ZERO,
            get: Duration::ZERO,
            create: Duration::ZERO,
            update: Duration::ZERO,
            delete: Duration::ZERO,
            analytics: Duration::ZERO,
        }
    }

    pub fn from_flag(simulate: bool) -> Self {
        if simulate { Self::default() } else { Self::none() }
    }

    pub fn is_disabled(&self) -> bool {
        *self == Self::none()
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(500),
            get: Duration::from_millis(300),
            create: Duration::from_millis(800),
            update: Duration::from_millis(600),
            delete: Duration::from_millis(400),
            analytics: Duration::from_millis(600),
        }
    }
}

pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_selects_profile() {
        assert_eq!(Latency::from_flag(true), Latency::default());
        assert!(Latency::from_flag(false).is_disabled());
        assert!(!Latency::default().is_disabled());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_waits_for_the_configured_delay() {
        let start = tokio::time::Instant::now();
        pause(Duration::from_millis(800)).await;
        assert!(start.elapsed() >= Duration::from_millis(800));
    }
}
