//! Percent/plus codec through the public API.

use kvquery::codec;

#[test]
fn test_decode_measure_then_fill() {
    let input = b"hello%20world+%21";
    let needed = codec::decode(input, &mut []);
    assert_eq!(needed, 13);

    let mut out = vec![0u8; needed];
    assert_eq!(codec::decode(input, &mut out), 13);
    assert_eq!(out, b"hello world !");
}

#[test]
fn test_encode_measure_then_fill() {
    let input = b"a b/c";
    let needed = codec::encode(input, &mut []);
    assert_eq!(needed, 7);

    let mut too_small = [0u8; 6];
    assert_eq!(codec::encode(input, &mut too_small), 7);
    assert_eq!(too_small, [0u8; 6]);

    let mut out = [0u8; 7];
    codec::encode(input, &mut out);
    assert_eq!(&out, b"a+b%2Fc");
}

#[test]
fn test_decode_inverts_encode() {
    let samples: [&[u8]; 4] = [
        b"plain",
        b"k=v&k2=v2",
        b"100% + 50% = 150%",
        "\u{4f60}\u{597d} world".as_bytes(),
    ];
    for sample in samples {
        let mut encoded = vec![0u8; codec::encoded_len(sample)];
        let n = codec::encode(sample, &mut encoded);
        assert_eq!(codec::decode_to_vec(&encoded[..n]), sample);
    }
}

#[test]
fn test_encode_string_helper() {
    assert_eq!(codec::encode_to_string(b"x y&z"), "x+y%26z");
}
