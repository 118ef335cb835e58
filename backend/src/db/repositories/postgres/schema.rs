// Diesel table definitions for the reference tables queried through the DSL.
// The spatial queries go through `sql_query` and are not described here.

diesel::table! {
    districts (district_id) {
        district_id -> Int8,
        name -> Text,
        #[sql_name = "type"]
        district_type -> Text,
        website_url -> Nullable<Text>,
    }
}

diesel::table! {
    programs (program_id) {
        program_id -> Int8,
        name -> Text,
        category -> Nullable<Text>,
    }
}
