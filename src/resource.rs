//! The resource module encapsulates domain entities for use with Bevy.

use std::ops::{Deref, DerefMut};

use bevy::ecs::system::Resource;

use crate::{domain, interface};

macro_rules! resource {
    ($name:ident, $target:ty) => {
        #[derive(Resource)]
        pub struct $name($target);

        impl Deref for $name {
            type Target = $target;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<$target> for $name {
            fn from(value: $target) -> Self {
                Self(value)
            }
        }
    };
}

resource!(RobotRes, domain::Robot);
resource!(NavigatorRes, domain::Navigator);
resource!(EnvironmentRes, domain::Environment);
resource!(ContextRes, domain::SimulationContext);
resource!(MailboxRes, interface::QueueMailbox);
