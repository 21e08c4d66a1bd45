pub mod maestro_client;

pub use maestro_client::MaestroClient;
