use std::io::{Read, Write};
use flate2::{Compression, write::GzEncoder, read::GzDecoder};
use thiserror::Error;

/// 魔数常量 - 用于标识内容索引文件格式
pub const MAGIC_BYTES: &[u8] = b"CFIDX";

/// 头部长度：魔数 + 两字节版本号 + 四字节原始长度
const HEADER_LEN: usize = MAGIC_BYTES.len() + 2 + 4;

/// 索引编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("数据太短，无法解析: {0} 字节")]
    TooShort(usize),

    #[error("无效的文件格式：魔数不匹配")]
    BadMagic,

    #[error("不支持的版本: {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("解压后数据大小不匹配: 期望 {expected} 字节, 实际 {actual} 字节")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("序列化失败: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("反序列化失败: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("压缩流读写失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 将对象序列化为二进制格式
pub fn to_binary<T: serde::Serialize>(obj: &T) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::serde::encode_to_vec(obj, bincode::config::standard())?)
}

/// 从二进制格式反序列化对象
pub fn from_binary<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    let (value, _) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    Ok(value)
}

/// 将对象序列化为带头部的 gzip 压缩二进制格式
pub fn to_compressed<T: serde::Serialize>(obj: &T, version: [u8; 2]) -> Result<Vec<u8>, CodecError> {
    let binary = to_binary(obj)?;

    let mut output = Vec::with_capacity(HEADER_LEN + binary.len() / 2);
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&version);
    output.extend_from_slice(&(binary.len() as u32).to_le_bytes());

    let mut encoder = GzEncoder::new(output, Compression::best());
    encoder.write_all(&binary)?;
    Ok(encoder.finish()?)
}

/// 校验头部并返回版本号，`max_major` 为支持的最大主版本
pub fn read_header(data: &[u8], max_major: u8) -> Result<[u8; 2], CodecError> {
    if data.len() < HEADER_LEN {
        return Err(CodecError::TooShort(data.len()));
    }
    if &data[..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(CodecError::BadMagic);
    }

    let offset = MAGIC_BYTES.len();
    let version = [data[offset], data[offset + 1]];
    if version[0] > max_major {
        return Err(CodecError::UnsupportedVersion {
            major: version[0],
            minor: version[1],
        });
    }
    Ok(version)
}

/// 从压缩格式反序列化对象
pub fn from_compressed<T: serde::de::DeserializeOwned>(
    data: &[u8],
    max_major: u8,
) -> Result<T, CodecError> {
    read_header(data, max_major)?;

    let size_offset = MAGIC_BYTES.len() + 2;
    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&data[size_offset..HEADER_LEN]);
    let expected = u32::from_le_bytes(size_bytes) as usize;

    // 头部长度不可信：预分配有上限，解压最多多读一个字节以发现长度不符
    let mut decompressed = Vec::with_capacity(expected.min(data.len().saturating_mul(64)));
    GzDecoder::new(&data[HEADER_LEN..])
        .take(expected as u64 + 1)
        .read_to_end(&mut decompressed)?;

    if decompressed.len() != expected {
        return Err(CodecError::SizeMismatch {
            expected,
            actual: decompressed.len(),
        });
    }

    from_binary(&decompressed)
}
