use stock::Desk;

pub mod command;
pub mod config;
pub mod identity;
pub mod server;

#[cfg(test)]
mod testing;

/// Shared state handed to every request.
pub struct Data {
    pub desk: Desk,
    pub support_email: Option<String>,
}
