use std::fs;

fn main() {
    // Validate default config at compile time
    let config_path = "src/default_config.toml";
    println!("cargo:rerun-if-changed={}", config_path);

    let content = fs::read_to_string(config_path).expect("Failed to read default_config.toml");

    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_config.toml: {}", e),
    };

    let page_url = table
        .get("page")
        .and_then(|page| page.get("url"))
        .and_then(|url| url.as_str());
    if page_url.is_none() {
        panic!("default_config.toml must set [page] url");
    }
}
