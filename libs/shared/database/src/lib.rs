pub mod error;
pub mod fixtures;
pub mod memory;
pub mod store;
pub mod supabase;
pub mod supabase_store;

pub use error::DbError;
pub use memory::InMemoryStore;
pub use store::{
    AppointmentStore, CatalogStore, ClosureStore, PatientStore, ScheduleStore, SchedulingStore,
};
pub use supabase::SupabaseClient;
pub use supabase_store::SupabaseStore;
