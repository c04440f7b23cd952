/// Install the pretty panic printer. Call before any other setup so even
/// early failures come out readable.
pub fn setup() {
    color_backtrace::install();
}
