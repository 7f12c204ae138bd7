//! Fitted preprocessing objects carried by the model artifact.

pub mod encoder;
pub mod scaler;

pub use encoder::LabelEncoder;
pub use scaler::StandardScaler;
