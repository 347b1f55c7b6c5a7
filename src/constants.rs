//! Values shared between producers and consumers which have to stay stable across deployments

use std::time::Duration;

/// Name of the replicated entity, used as the prefix of every event tag
pub const ENTITY: &str = "mahasiswa";

/// Topic on which student lifecycle events are published
pub const STUDENT_TOPIC: &str = "pelatihan_kafka.producer.mahasiswa";

/// Topic for free-form payloads sent by the `produce` command
pub const DEMO_TOPIC: &str = "pelatihan_kafka";

/// Tag of the free-form payload sent when `produce` is called without arguments
pub const DEMO_EVENT: &str = "pelatihan.kafka.demo";

/// Header names attached to every published message
pub mod headers {
    /// Fallback location of the entity id when the body carries none
    pub const ID: &str = "id";
    /// Freshly generated identifier tying a message to its publication
    pub const CORRELATION_ID: &str = "correlation_id";
    /// Name of the publishing application
    pub const APP: &str = "app";
}

/// Number of broker connection attempts made over the lifetime of a consumer process
pub const CONNECT_ATTEMPTS: u32 = 3;

/// Delay between two broker connection attempts
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);
