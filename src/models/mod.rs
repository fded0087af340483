pub mod config;
pub mod exhibition;
pub mod location;
pub mod painting;
pub mod photo;
pub mod price;
pub mod series;

pub use config::*;
pub use exhibition::*;
pub use location::*;
pub use painting::*;
pub use photo::*;
pub use price::*;
pub use series::*;
