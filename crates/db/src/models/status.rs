//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

use dramagen_core::image_generation::GenerationStatus;
use dramagen_core::task::TaskStatus;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up the variant for a database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Task ledger status.
    TaskStatusId {
        Pending = 1,
        Processing = 2,
        Completed = 3,
        Failed = 4,
    }
}

define_status_enum! {
    /// Downstream image generation record status.
    ImageGenerationStatusId {
        Pending = 1,
        Processing = 2,
        Completed = 3,
        Failed = 4,
    }
}

impl From<TaskStatus> for TaskStatusId {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Pending => Self::Pending,
            TaskStatus::Processing => Self::Processing,
            TaskStatus::Completed => Self::Completed,
            TaskStatus::Failed => Self::Failed,
        }
    }
}

impl From<TaskStatusId> for TaskStatus {
    fn from(value: TaskStatusId) -> Self {
        match value {
            TaskStatusId::Pending => Self::Pending,
            TaskStatusId::Processing => Self::Processing,
            TaskStatusId::Completed => Self::Completed,
            TaskStatusId::Failed => Self::Failed,
        }
    }
}

impl From<ImageGenerationStatusId> for GenerationStatus {
    fn from(value: ImageGenerationStatusId) -> Self {
        match value {
            ImageGenerationStatusId::Pending => Self::Pending,
            ImageGenerationStatusId::Processing => Self::Processing,
            ImageGenerationStatusId::Completed => Self::Completed,
            ImageGenerationStatusId::Failed => Self::Failed,
        }
    }
}

/// Terminal task statuses: completed, failed.
pub const TERMINAL_TASK_STATUS_IDS: [StatusId; 2] = [
    TaskStatusId::Completed as StatusId,
    TaskStatusId::Failed as StatusId,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_ids_match_seed_data() {
        assert_eq!(TaskStatusId::Pending.id(), 1);
        assert_eq!(TaskStatusId::Processing.id(), 2);
        assert_eq!(TaskStatusId::Completed.id(), 3);
        assert_eq!(TaskStatusId::Failed.id(), 4);
    }

    #[test]
    fn image_generation_status_ids_match_seed_data() {
        assert_eq!(ImageGenerationStatusId::Pending.id(), 1);
        assert_eq!(ImageGenerationStatusId::Failed.id(), 4);
    }

    #[test]
    fn from_id_rejects_unknown_values() {
        assert_eq!(TaskStatusId::from_id(2), Some(TaskStatusId::Processing));
        assert_eq!(TaskStatusId::from_id(0), None);
        assert_eq!(ImageGenerationStatusId::from_id(9), None);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = TaskStatusId::Failed.into();
        assert_eq!(id, 4);
    }

    #[test]
    fn core_and_db_task_statuses_agree() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::Processing,
            TaskStatus::Completed,
            TaskStatus::Failed,
        ] {
            let id: TaskStatusId = status.into();
            assert_eq!(TaskStatus::from(id), status);
        }
    }
}
