use lmfdb_web::config::ServerConfig;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_example_config() {
    let config = ServerConfig::from_file("lmfdb_web.yaml");
    assert!(config.is_ok(), "Failed to load example config: {:?}", config.err());

    let config = config.unwrap();
    assert_eq!(config, ServerConfig::default());
}

#[test]
fn test_load_minimal_config() {
    let file = write_config("search_page_size: 20\n");

    let config = ServerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.search_page_size, 20);
    // Check defaults are applied
    assert_eq!(config.listen_address, "127.0.0.1:37777");
    assert_eq!(config.max_search_page_size, 1000);
    assert_eq!(config.zero_search_time_limit_secs, 10);
}

#[test]
fn test_load_invalid_config() {
    let file = write_config("search_page_size: 5000\n");
    assert!(ServerConfig::from_file(file.path()).is_err());

    let file = write_config("listen_address: \"not an address\"\n");
    assert!(ServerConfig::from_file(file.path()).is_err());

    let file = write_config("zero_search_time_limit_secs: 0\n");
    assert!(ServerConfig::from_file(file.path()).is_err());
}

#[test]
fn test_load_malformed_yaml() {
    let file = write_config("search_page_size: [1, 2\n");
    assert!(ServerConfig::from_file(file.path()).is_err());
}

#[test]
fn test_load_nonexistent_file() {
    let config = ServerConfig::from_file("nonexistent.yaml");
    assert!(config.is_err(), "Should fail when file doesn't exist");
}
