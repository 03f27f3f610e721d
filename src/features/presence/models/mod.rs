mod presence;

pub use presence::PresenceRecord;
