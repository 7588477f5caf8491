use std::time::Duration;

use carmine::Connection;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let mut conn = Connection::new();
	conn.connect("127.0.0.1", 6379, Some(Duration::from_secs(1)))
		.await?;

	conn.command(&["PING"])?;
	println!("PING -> {:?}", conn.read().await?);

	// Queue two commands; they flush as one burst on the next read.
	conn.command(&["SET", "greeting", "hello"])?;
	conn.command(&["GET", "greeting"])?;
	println!("SET -> {:?}", conn.read().await?);
	println!("GET -> {:?}", conn.read().await?);

	conn.disconnect()?;
	Ok(())
}
