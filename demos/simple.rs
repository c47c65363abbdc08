use kyber_kem::{generate_keypair, Ciphertext, DecapsulationKey, EncapsulationKey, Kind};

fn main() {
    let mut rng = rand::thread_rng();

    // Generate a keypair
    let (ek, dk) = generate_keypair(Kind::MlKem768, &mut rng);

    // Serialize the decapsulation key, maybe to save on disk
    let dk_bytes = dk.as_bytes().to_vec();

    // Deserialize it again. The parameter set is recovered from the length, and the key is
    // checked against the hash of the encapsulation key stored inside it
    let dk = DecapsulationKey::from_bytes(&dk_bytes).expect("valid decapsulation key");

    // The encapsulation key is what gets published
    let ek_bytes = ek.as_bytes().to_vec();
    let ek = EncapsulationKey::from_bytes(&ek_bytes).expect("valid encapsulation key");
    assert_eq!(dk.encapsulation_key(), &ek);

    // Encapsulate a shared secret, ss1, to ek
    let (ss1, ct) = ek.encapsulate(&mut rng);

    // The receiver gets raw bytes and knows which parameter set they agreed on
    let ct_bytes = ct.as_bytes().to_vec();
    let receiver_ct = Ciphertext::from_bytes(Kind::MlKem768, &ct_bytes).expect("right length");

    // Use the decapsulation key to decapsulate the ciphertext
    let ss2 = dk
        .decapsulate(receiver_ct.as_bytes())
        .expect("right length");

    // Shared secrets compare in constant time
    assert_eq!(ss1, ss2);

    // A ciphertext of the wrong length is the only way decapsulation fails
    let err = dk.decapsulate(&ct_bytes[1..]).unwrap_err();
    println!("short ciphertext rejected: {err}");

    println!("KEM ran successfully");
}
