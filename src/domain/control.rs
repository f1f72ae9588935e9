//! Control messages and the run state they drive.

/// Collision notification. The target is addressed as `object id + 1`, zero addresses nothing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Bump {
    pub target_id: u32,
}

impl Bump {
    pub fn for_object(id: u32) -> Self {
        Self {
            target_id: id.saturating_add(1),
        }
    }

    pub fn object_id(&self) -> Option<u32> {
        self.target_id.checked_sub(1)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlMessage {
    Start,
    Pause,
    Bump(Bump),
}

/// Non-blocking source of control messages.
pub trait Mailbox {
    fn receive(&mut self) -> Option<ControlMessage>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SimulationState {
    Started,
    Paused,
}

/// Simulation-wide state shared by the robot and the environment side. Before the first
/// `Start` there is no state and nothing runs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SimulationContext {
    state: Option<SimulationState>,
    port: Option<u16>,
}

impl SimulationContext {
    pub fn new(port: u16) -> Self {
        Self {
            state: None,
            port: Some(port),
        }
    }

    pub fn state(&self) -> Option<SimulationState> {
        self.state
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn is_started(&self) -> bool {
        self.state == Some(SimulationState::Started)
    }

    /// Applies a control message. Bumps do not change the state and are handed back for
    /// dispatching.
    pub fn handle(&mut self, message: ControlMessage) -> Option<Bump> {
        match message {
            ControlMessage::Start => self.state = Some(SimulationState::Started),
            ControlMessage::Pause => self.state = Some(SimulationState::Paused),
            ControlMessage::Bump(bump) => return Some(bump),
        }
        None
    }

    /// Polls at most one message from the mailbox and applies it.
    pub fn poll(&mut self, mailbox: &mut impl Mailbox) -> Option<Bump> {
        mailbox.receive().and_then(|message| self.handle(message))
    }
}
