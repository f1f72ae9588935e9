//! In-process implementations of the messaging and sensing interfaces.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::domain::{ControlMessage, Environment, Mailbox, Point, SensedObject, Sensor};

/// FIFO mailbox that can be cloned and shared between producers.
#[derive(Clone, Debug, Default)]
pub struct QueueMailbox(Arc<Mutex<VecDeque<ControlMessage>>>);

impl QueueMailbox {
    pub fn send(&self, message: ControlMessage) {
        self.queue().push_back(message);
    }

    pub fn len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<ControlMessage>> {
        // Only whole messages are pushed or popped under the lock.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Mailbox for QueueMailbox {
    fn receive(&mut self) -> Option<ControlMessage> {
        self.queue().pop_front()
    }
}

/// Reports the environment objects within a radius around the queried position. A radius of
/// zero reports all objects.
pub struct ProximitySensor<'a> {
    environment: &'a Environment,
    radius: f64,
}

impl<'a> ProximitySensor<'a> {
    pub fn new(environment: &'a Environment, radius: f64) -> Self {
        Self {
            environment,
            radius,
        }
    }
}

impl Sensor for ProximitySensor<'_> {
    fn query(&mut self, origin: Point) -> Vec<SensedObject> {
        self.environment.neighbours(origin, self.radius)
    }
}
