mod pod_list;

pub use pod_list::PodListScreen;
