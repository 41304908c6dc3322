use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::time::{Instant, Sleep, sleep};

/// A one-shot timer that can be re-armed. An unarmed timer never fires.
pub struct Timer {
    sleep: Pin<Box<Sleep>>,
    armed: bool,
}

impl Timer {
    pub fn manual() -> Self {
        Timer {
            sleep: Box::pin(sleep(Duration::ZERO)),
            armed: false,
        }
    }

    pub fn after(delay: Duration) -> Self {
        let mut timer = Self::manual();
        timer.set_next_fire(delay);
        timer
    }

    pub fn set_next_fire(&mut self, delay: Duration) {
        self.sleep.as_mut().reset(Instant::now() + delay);
        self.armed = true;
    }

    pub fn cancel(&mut self) { self.armed = false; }

    pub fn is_armed(&self) -> bool { self.armed }
}

impl Future for Timer {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if !self.armed {
            return Poll::Pending;
        }
        match self.sleep.as_mut().poll(cx) {
            Poll::Ready(()) => {
                self.armed = false;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
