mod main_gui;

fn main() {
    main_gui::main();
}
