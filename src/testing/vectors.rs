//! Published and recorded protocol vectors
//!
//! The `FIDO_EXAMPLE_*` values are example 8.1 of the FIDO U2F raw message
//! formats document. The `TOKEN_*` values were recorded from a hardware token
//! driven by Chrome against `http://localhost:3483`; its attestation
//! certificate chains to the manufacturer root, so registration checks using
//! them skip attestation.

/// App id of the FIDO example registration
pub const FIDO_EXAMPLE_APP_ID: &str = "http://example.com";

/// Raw registration message of the FIDO example, hex
pub const FIDO_EXAMPLE_REGISTRATION_HEX: &str =
    "0504b174bc49c7ca254b70d2e5c207cee9cf174820ebd77ea3c65508c26da51b657c1cc6b952\
    f8621697936482da0a6d3d3826a59095daf6cd7c03e2e60385d2f6d9402a552dfdb7477ed65f\
    d84133f86196010b2215b57da75d315b7b9e8fe2e3925a6019551bab61d16591659cbaf00b49\
    50f7abfe6660e2e006f76868b772d70c253082013c3081e4a003020102020a47901280001155\
    957352300a06082a8648ce3d0403023017311530130603550403130c476e756262792050696c\
    6f74301e170d3132303831343138323933325a170d3133303831343138323933325a3031312f\
    302d0603550403132650696c6f74476e756262792d302e342e312d3437393031323830303031\
    3135353935373335323059301306072a8648ce3d020106082a8648ce3d030107034200048d61\
    7e65c9508e64bcc5673ac82a6799da3c1446682c258c463fffdf58dfd2fa3e6c378b53d795c4\
    a4dffb4199edd7862f23abaf0203b4b8911ba0569994e101300a06082a8648ce3d0403020347\
    003044022060cdb6061e9c22262d1aac1d96d8c70829b2366531dda268832cb836bcd30dfa02\
    20631b1459f09e6330055722c8d89b7f48883b9089b88d60d1d9795902b30410df3045022014\
    71899bcc3987e62e8202c9b39c33c19033f7340352dba80fcab017db9230e402210082677d67\
    3d891933ade6f617e5dbde2e247e70423fd5ad7804a6d3d3961ef871";

/// Key handle inside the FIDO example, hex
pub const FIDO_EXAMPLE_KEY_HANDLE_HEX: &str =
    "2a552dfdb7477ed65fd84133f86196010b2215b57da75d315b7b9e8fe2e3925a6019551bab61\
    d16591659cbaf00b4950f7abfe6660e2e006f76868b772d70c25";

/// Attestation certificate inside the FIDO example, DER hex
pub const FIDO_EXAMPLE_CERTIFICATE_HEX: &str =
    "3082013c3081e4a003020102020a47901280001155957352300a06082a8648ce3d0403023017\
    311530130603550403130c476e756262792050696c6f74301e170d3132303831343138323933\
    325a170d3133303831343138323933325a3031312f302d0603550403132650696c6f74476e75\
    6262792d302e342e312d34373930313238303030313135353935373335323059301306072a86\
    48ce3d020106082a8648ce3d030107034200048d617e65c9508e64bcc5673ac82a6799da3c14\
    46682c258c463fffdf58dfd2fa3e6c378b53d795c4a4dffb4199edd7862f23abaf0203b4b891\
    1ba0569994e101300a06082a8648ce3d0403020347003044022060cdb6061e9c22262d1aac1d\
    96d8c70829b2366531dda268832cb836bcd30dfa0220631b1459f09e6330055722c8d89b7f48\
    883b9089b88d60d1d9795902b30410df";

/// Registration signature inside the FIDO example, DER hex
pub const FIDO_EXAMPLE_SIGNATURE_HEX: &str =
    "304502201471899bcc3987e62e8202c9b39c33c19033f7340352dba80fcab017db9230e40221\
    0082677d673d891933ade6f617e5dbde2e247e70423fd5ad7804a6d3d3961ef871";

/// User public key inside the FIDO example, uncompressed point hex
pub const FIDO_EXAMPLE_PUBLIC_KEY_HEX: &str =
    "04b174bc49c7ca254b70d2e5c207cee9cf174820ebd77ea3c65508c26da51b657c1cc6b952f8\
    621697936482da0a6d3d3826a59095daf6cd7c03e2e60385d2f6d9";

/// Challenge the FIDO example client data carries
pub const FIDO_EXAMPLE_CHALLENGE: &str = "vqrS6WXDe1JUs5_c3i4-LkKIHRr-3XVb3azuA5TifHo";

/// Client data JSON signed over by the FIDO example registration
pub const FIDO_EXAMPLE_CLIENT_DATA: &str = r#"{"typ":"navigator.id.finishEnrollment","challenge":"vqrS6WXDe1JUs5_c3i4-LkKIHRr-3XVb3azuA5TifHo","cid_pubkey":{"kty":"EC","crv":"P-256","x":"HzQwlfXX7Q4S5MtCCnZUNBw3RMzPO9tOyWjBqRl4tJ8","y":"XVguGFLIZx1fXg3wNqfdbn75hi4-_7-BxhMljw42Ht4"},"origin":"http://example.com"}"#;

/// App id the hardware token was registered against
pub const TOKEN_APP_ID: &str = "http://localhost:3483";

/// Registration challenge issued to the hardware token, base64url
pub const TOKEN_REGISTER_CHALLENGE: &str = "s4UJ3wkN80p4wLjyI2Guv-_a-s7LV54Ic9PAZvHo_lM";

/// `registrationData` returned by the hardware token
pub const TOKEN_REGISTRATION_DATA: &str =
    "BQTD17IP7bZ3Gcd7l5Ao4qqohsUcm0bcXgHLpn0pv2VWNl7SBtNFo0wEoAdMrHlFXGzJgQz_bRZa\
    KXZfHyd3fAo0QJmZkSv9ZbTKz7TVO6jnOcKGrSHb15JDatMMFxHxN5BR56CE3sj10jtGOY7szQIi\
    4RGU6kONIuriAarxuEFJ5IswggIcMIIBBqADAgECAgQk26tAMAsGCSqGSIb3DQEBCzAuMSwwKgYD\
    VQQDEyNZdWJpY28gVTJGIFJvb3QgQ0EgU2VyaWFsIDQ1NzIwMDYzMTAgFw0xNDA4MDEwMDAwMDBa\
    GA8yMDUwMDkwNDAwMDAwMFowKzEpMCcGA1UEAwwgWXViaWNvIFUyRiBFRSBTZXJpYWwgMTM1MDMy\
    Nzc4ODgwWTATBgcqhkjOPQIBBggqhkjOPQMBBwNCAAQCsJS-NH1HeUHEd46-xcpN7SpHn6oeb-w5\
    r-veDCBwy1vUvWnJanjjv4dR_rV5G436ysKUAXUcsVe5fAnkORo2oxIwEDAOBgorBgEEAYLECgEB\
    BAAwCwYJKoZIhvcNAQELA4IBAQCjY64OmDrzC7rxLIst81pZvxy7ShsPy2jEhFWEkPaHNFhluNsC\
    acNG5VOITCxWB68OonuQrIzx70MfcqwYnbIcgkkUvxeIpVEaM9B7TI40ZHzp9h4VFqmps26QCkAg\
    YfaapG4SxTK5k_lCPvqqTPmjtlS03d7ykkpUj9WZlVEN1Pf02aTVIZOHPHHJuH6GhT6eLadejwxt\
    KDBTdNTv3V4UlvjDOQYQe9aL1jUNqtLDeBHso8pDvJMLc0CX3vadaI2UVQxM-xip4kuGouXYj0mY\
    maCbzluBDFNsrzkNyL3elg3zMMrKvAUhoYMjlX_-vKWcqQsgsQ0JtSMcWMJ-umeDMEQCIApTYovL\
    r8citOpIKkyNidCQz7UeSOWNMlPBB-s3r4G9AiAskXkh7iale4QDe6a-675L3xzohYb8Fcvz3gH6\
    dkDLvw";

/// `clientData` returned with the registration
pub const TOKEN_REGISTRATION_CLIENT_DATA: &str =
    "eyJ0eXAiOiJuYXZpZ2F0b3IuaWQuZmluaXNoRW5yb2xsbWVudCIsImNoYWxsZW5nZSI6InM0VUoz\
    d2tOODBwNHdManlJMkd1di1fYS1zN0xWNTRJYzlQQVp2SG9fbE0iLCJvcmlnaW4iOiJodHRwOi8v\
    bG9jYWxob3N0OjM0ODMiLCJjaWRfcHVia2V5IjoiIn0";

/// Authentication challenge issued to the hardware token, base64url
pub const TOKEN_SIGN_CHALLENGE: &str = "PzN6SGiUaeypErE3SCHeRlkRxVwfWlGVi35gfq6LsdY";

/// Key handle the hardware token assigned, base64url
pub const TOKEN_KEY_HANDLE: &str =
    "mZmRK_1ltMrPtNU7qOc5woatIdvXkkNq0wwXEfE3kFHnoITeyPXSO0Y5juzNAiLhEZTqQ40i6uIBqvG4QUnkiw";

/// `signatureData` returned by the hardware token
pub const TOKEN_SIGNATURE_DATA: &str =
    "AQAAAAYwRAIgBuyafOXoc9Q7fARcs2JbCZdtnMzVCyeJC-J-2Im1IBsCIDxkzmvPX9RCY8uts4wM1y4wEX9LmNH2Mz_VFd-JdyGE";

/// `clientData` returned with the authentication
pub const TOKEN_SIGN_CLIENT_DATA: &str =
    "eyJ0eXAiOiJuYXZpZ2F0b3IuaWQuZ2V0QXNzZXJ0aW9uIiwiY2hhbGxlbmdlIjoiUHpONlNHaVVh\
    ZXlwRXJFM1NDSGVSbGtSeFZ3ZldsR1ZpMzVnZnE2THNkWSIsIm9yaWdpbiI6Imh0dHA6Ly9sb2Nh\
    bGhvc3Q6MzQ4MyIsImNpZF9wdWJrZXkiOiIifQ";

/// Counter value carried by `TOKEN_SIGNATURE_DATA`
pub const TOKEN_SIGN_COUNTER: u32 = 6;
