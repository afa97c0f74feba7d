fn main() {
    let greeting = "Hello";
    println!("{}, world!", greeting);
}
