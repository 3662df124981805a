fn main() {
    sensor_lab_plots::cli::run();
}
