//! Command definitions
//!
//! Represents requests sent to the store server.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = 0x01,
    Set = 0x02,
    Keys = 0x03,
    Ping = 0x04,
    Quit = 0x05,
}

impl TryFrom<u8> for CommandType {
    type Error = u8;

    fn try_from(byte: u8) -> std::result::Result<Self, u8> {
        match byte {
            0x01 => Ok(CommandType::Get),
            0x02 => Ok(CommandType::Set),
            0x03 => Ok(CommandType::Keys),
            0x04 => Ok(CommandType::Ping),
            0x05 => Ok(CommandType::Quit),
            other => Err(other),
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: String },

    /// Store a value under a key, replacing any previous value
    Set { key: String, value: Vec<u8> },

    /// Enumerate keys matching a glob pattern
    Keys { pattern: String },

    /// Ping (health check)
    Ping,

    /// Close the connection after replying
    Quit,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Keys { .. } => CommandType::Keys,
            Command::Ping => CommandType::Ping,
            Command::Quit => CommandType::Quit,
        }
    }
}
