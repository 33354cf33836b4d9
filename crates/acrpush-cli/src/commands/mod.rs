mod ci;
mod interactive;

pub use ci::ci;
pub use interactive::interactive;
