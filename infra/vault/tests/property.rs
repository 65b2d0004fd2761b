use odk_vault::prelude::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn roundtrip_arbitrary_plaintexts(plaintext in ".{0,512}") {
        let vault = Vault::<Aes>::builder()
            .key(MasterKey::generate())
            .build()
            .unwrap();

        let sealed = vault.encrypt(&plaintext).unwrap();
        let restored = vault.decrypt(&sealed).unwrap();
        prop_assert_eq!(restored, plaintext);
    }

    #[test]
    fn sealed_blobs_never_repeat(plaintext in ".{0,128}") {
        let vault = Vault::<ChaCha>::builder()
            .key(MasterKey::generate())
            .build()
            .unwrap();

        let first = vault.encrypt(&plaintext).unwrap();
        let second = vault.encrypt(&plaintext).unwrap();
        prop_assert_ne!(first, second);
    }
}
