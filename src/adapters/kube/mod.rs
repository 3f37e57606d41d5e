pub mod in_cluster_client;
