use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// 最新値だけを保持する単一スロット（上書き、キューではない）
///
/// 書き込み側（キャプチャスレッド）と読み出し側（描画ループ）で共有する。
/// 読み出し側は待たずに最後に書かれた値を受け取る。
pub struct LatestSlot<T> {
    value: Arc<Mutex<Option<T>>>,
    sequence: Arc<AtomicU64>,
}

impl<T> Clone for LatestSlot<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            sequence: Arc::clone(&self.sequence),
        }
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            value: Arc::new(Mutex::new(None)),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 値を上書きする。未読の古い値は捨てられる
    pub fn publish(&self, value: T) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
        self.sequence.fetch_add(1, Ordering::Release);
    }

    /// publish の回数。新しい値が来るたびに増える
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }
}

impl<T> LatestSlot<T> {
    /// drop 時に value を publish するガードを返す
    ///
    /// 書き込み側スレッドが panic で巻き戻った場合も drop は走るので、
    /// 読み出し側に古い値が残り続けない。
    pub fn publish_on_drop(&self, value: T) -> PublishOnDrop<T> {
        PublishOnDrop {
            slot: self.clone(),
            value: Some(value),
        }
    }
}

/// [`LatestSlot::publish_on_drop`] のガード
pub struct PublishOnDrop<T> {
    slot: LatestSlot<T>,
    value: Option<T>,
}

impl<T> Drop for PublishOnDrop<T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.slot.publish(value);
        }
    }
}

impl<T: Clone> LatestSlot<T> {
    /// 最新値を取得。値は保持されるので何度でも取得できる。
    /// 初回 publish 前のみ None。
    pub fn latest(&self) -> Option<T> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_empty_slot() {
        let slot: LatestSlot<u32> = LatestSlot::new();
        assert_eq!(slot.latest(), None);
        assert_eq!(slot.sequence(), 0);
    }

    #[test]
    fn test_overwrite_keeps_only_latest() {
        let slot = LatestSlot::new();
        slot.publish(1);
        slot.publish(2);
        slot.publish(3);
        assert_eq!(slot.latest(), Some(3));
        assert_eq!(slot.sequence(), 3);
        // 読み出しでは消えない
        assert_eq!(slot.latest(), Some(3));
    }

    #[test]
    fn test_shared_across_threads() {
        let slot = LatestSlot::new();
        let writer = slot.clone();
        let handle = thread::spawn(move || {
            for i in 0..100u32 {
                writer.publish(i);
            }
        });
        handle.join().unwrap();
        assert_eq!(slot.latest(), Some(99));
        assert_eq!(slot.sequence(), 100);
    }

    #[test]
    fn test_guard_publishes_when_writer_panics() {
        let slot: LatestSlot<Option<u32>> = LatestSlot::new();
        let writer = slot.clone();
        let handle = thread::spawn(move || {
            let _guard = writer.publish_on_drop(None);
            writer.publish(Some(7));
            panic!("inference failed");
        });
        assert!(handle.join().is_err());
        // 最後の Some(7) ではなく「値なし」が残る
        assert_eq!(slot.latest(), Some(None));
        assert_eq!(slot.sequence(), 2);
    }

    #[test]
    fn test_guard_publishes_on_normal_exit() {
        let slot: LatestSlot<Option<u32>> = LatestSlot::new();
        {
            let _guard = slot.publish_on_drop(None);
            slot.publish(Some(1));
            assert_eq!(slot.latest(), Some(Some(1)));
        }
        assert_eq!(slot.latest(), Some(None));
    }
}
