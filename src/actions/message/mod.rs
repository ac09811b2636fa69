//! Outbound message formation: the last step of every flow.

pub mod authentication;
pub mod registration;
pub mod token;
pub mod webfinger;

pub use authentication::FormAuthenticationResponse;
pub use registration::FormRegistrationResponse;
pub use token::FormTokenResponse;
pub use webfinger::FormWebFingerResponse;
