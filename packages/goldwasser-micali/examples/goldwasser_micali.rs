use goldwasser_micali::config::KeyGenConfig;
use goldwasser_micali::goldwasser_micali::generate_keys;
use goldwasser_micali::key::{PrivateKey, PublicKey};

fn main() {
    let plaintext = b"hello world";
    let mut rng = rand::thread_rng();

    let decrypted = generate_keys(&KeyGenConfig::with_bit_length(256), &mut rng)
        .and_then(|(public_key, private_key)| {
            let ciphertext = public_key.encrypt_bytes(plaintext, &mut rng);
            private_key.decrypt_bytes(&ciphertext)
        });

    match decrypted {
        Ok(decrypted_plaintext) => println!("{}", String::from_utf8_lossy(&decrypted_plaintext)),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}
