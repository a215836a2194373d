fn main() {
    // Only the firmware image needs the ESP-IDF link environment; host
    // builds and tests skip it entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
