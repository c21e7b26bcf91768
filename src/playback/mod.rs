pub mod gst_transport;
pub mod resolver;
pub mod session;
#[cfg(test)]
pub mod testing;
pub mod transport;
