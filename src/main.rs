fn main() {
    fish_arcade::game::run();
}
