pub mod fingerprint;

pub use fingerprint::{fingerprint, fingerprint_bytes, fingerprint_file, FINGERPRINT_LEN};
