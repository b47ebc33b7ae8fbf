pub mod mock_messaging_gateway;

#[allow(unused_imports)]
pub use mock_messaging_gateway::{MockMessagingGateway, SentMessage};
