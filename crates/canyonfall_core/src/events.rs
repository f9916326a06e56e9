use std::sync::mpsc;

/// Producer half; clone it to publish from several places.
pub struct EventSender<T> {
    tx: mpsc::Sender<T>,
}

/// Consumer half, polled once per host-loop tick with [`EventReceiver::drain`].
pub struct EventReceiver<T> {
    rx: mpsc::Receiver<T>,
}

pub fn channel<T>() -> (EventSender<T>, EventReceiver<T>) {
    let (tx, rx) = mpsc::channel();
    (EventSender { tx }, EventReceiver { rx })
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> EventSender<T> {
    /// Fails once every receiver has been dropped.
    pub fn send(&self, event: T) -> Result<(), mpsc::SendError<T>> {
        self.tx.send(event)
    }
}

impl<T> EventReceiver<T> {
    /// Everything queued since the last call, oldest first. Never blocks;
    /// an empty vector means nothing new.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }
}
