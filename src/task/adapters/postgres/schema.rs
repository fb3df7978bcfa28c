//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning user identifier.
        owner_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Task lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Cognitive load rating between 1 and 10.
        cognitive_load -> Int4,
        /// Optional time estimate in minutes.
        estimated_minutes -> Nullable<Int4>,
        /// Optional time actually spent in minutes.
        actual_minutes -> Nullable<Int4>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
        /// Archive timestamp, set only for archived tasks.
        archived_at -> Nullable<Timestamptz>,
        /// Optimistic concurrency version, bumped on every update.
        version -> Int8,
    }
}
