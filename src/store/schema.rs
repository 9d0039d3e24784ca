table! {
    kv_entries (namespace, field) {
        namespace -> Varchar,
        field -> Varchar,
        value -> Text,
    }
}
