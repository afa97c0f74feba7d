// generated
fn main() {
    let greeting = "Howdy";
    println!("{}, Rust!", greeting);
}
