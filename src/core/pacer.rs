use std::time::Duration;

/// 요청 사이에 넣는 고정 지연 전략.
/// 업스트림 사이트에 대한 예의로 넣는 것이며, 테스트에서는 기록만 하는 구현으로 바꾼다.
pub trait Pacer {
    fn pause(&self, duration: Duration);
}

/// 실제로 스레드를 재우는 기본 구현.
pub struct ThreadSleep;

impl Pacer for ThreadSleep {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::time::Duration;

    use super::Pacer;

    /// 요청된 지연을 기록만 하고 기다리지 않는다.
    #[derive(Default)]
    pub struct RecordingPacer {
        pub pauses: RefCell<Vec<Duration>>,
    }

    impl RecordingPacer {
        pub fn count(&self) -> usize {
            self.pauses.borrow().len()
        }
    }

    impl Pacer for RecordingPacer {
        fn pause(&self, duration: Duration) {
            self.pauses.borrow_mut().push(duration);
        }
    }
}
