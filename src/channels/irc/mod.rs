mod channel;
mod message;
mod parse;

pub use channel::IrcChannel;
