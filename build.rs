fn main() {
    // ESP-IDF link/cfg forwarding is only meaningful for firmware builds;
    // host-target test builds have no sysenv to forward.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
