//! Status enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:expr ),+ $(,)?
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

            /// Seed-table name for this status (snake_case, as stored).
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Look up a variant from its database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
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
    /// Project lifecycle status.
    ProjectStatus {
        Draft = 1 => "draft",
        ScriptGenerating = 2 => "script_generating",
        ScriptReady = 3 => "script_ready",
        Generating = 4 => "generating",
        Paused = 5 => "paused",
        Completed = 6 => "completed",
        Failed = 7 => "failed",
        Cancelled = 8 => "cancelled",
    }
}

define_status_enum! {
    /// Scene processing pipeline status.
    SceneStatus {
        Pending = 1 => "pending",
        Generating = 2 => "generating",
        Merging = 3 => "merging",
        Narrating = 4 => "narrating",
        Completed = 5 => "completed",
        Failed = 6 => "failed",
        Skipped = 7 => "skipped",
    }
}

define_status_enum! {
    /// External generation request status.
    GenerationStatus {
        Pending = 1 => "pending",
        Completed = 2 => "completed",
        Failed = 3 => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_status_round_trips_through_id() {
        for status in [
            ProjectStatus::Draft,
            ProjectStatus::ScriptGenerating,
            ProjectStatus::ScriptReady,
            ProjectStatus::Generating,
            ProjectStatus::Paused,
            ProjectStatus::Completed,
            ProjectStatus::Failed,
            ProjectStatus::Cancelled,
        ] {
            assert_eq!(ProjectStatus::from_id(status.id()), Some(status));
        }
    }

    #[test]
    fn scene_status_names_match_seed_data() {
        assert_eq!(SceneStatus::Pending.name(), "pending");
        assert_eq!(SceneStatus::Narrating.name(), "narrating");
        assert_eq!(SceneStatus::Skipped.name(), "skipped");
    }

    #[test]
    fn unknown_id_is_none() {
        assert_eq!(ProjectStatus::from_id(99), None);
        assert_eq!(SceneStatus::from_id(0), None);
        assert_eq!(GenerationStatus::from_id(-1), None);
    }
}
