//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements       | Connects to                 |
//! |------------|------------------|-----------------------------|
//! | `hardware` | ServoPort        | PCA9685 servo bus           |
//! |            | DisplayPort      | Eye display panels          |
//! |            | LightPort        | Chest light array           |
//! | `log_sink` | EventSink        | Serial log output           |
//! | `storage`  | CalibrationStore | JSON snapshot file          |
//! | `time`     | —                | Host monotonic clock        |

pub mod hardware;
pub mod log_sink;
pub mod storage;
pub mod time;
