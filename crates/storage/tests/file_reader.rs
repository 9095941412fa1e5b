use cani_storage::{FileError, FileReader};
use embedded_io::{
    blocking::{Read, Seek},
    SeekFrom,
};

const BLOCK_SIZE: usize = 32;

const LOREM: &str = "The standard Lorem Ipsum passage, used since the 1500s \
    Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
    tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, ";

fn make_block_device(s: impl AsRef<[u8]>) -> Vec<u8> {
    let mut bytes = s.as_ref().to_owned();

    let add_bytes = BLOCK_SIZE - bytes.len() % BLOCK_SIZE;
    bytes.extend(std::iter::repeat(0).take(add_bytes));
    bytes
}

fn read_in_parts<R: Read>(reader: &mut R, part_len: usize) -> Vec<u8> {
    let mut out = vec![];
    loop {
        let mut buf = vec![0_u8; part_len];
        let bytes_read = reader.read(&mut buf).unwrap();
        if bytes_read == 0 {
            break;
        }

        out.extend_from_slice(&buf[0..bytes_read]);
    }
    out
}

#[test]
fn test_make_block_device() {
    let block = make_block_device("hello world");
    assert_eq!(block.len(), 32);

    // More big block
    let block = make_block_device("Section 1.10.32 of 'de Finibus Bonorum");
    assert_eq!(block.len(), 64);

    // The biggest one
    let block = make_block_device(
        "Section 1.10.32 of 'de Finibus Bonorum et Malorum', written by Cicero in 45 BC",
    );
    assert_eq!(block.len(), 96);
}

#[test]
fn test_file_reader_read_exact_lesser_than_block() {
    let s = "hello world";
    let blocks = make_block_device(s);

    let mut reader = FileReader::<_, _, BLOCK_SIZE>::new_in_array(blocks.as_slice(), s.len());
    assert_eq!(reader.len(), s.len());

    let mut buf = vec![0_u8; s.len()];
    reader.read_exact(&mut buf).unwrap();

    assert_eq!(s, String::from_utf8_lossy(&buf));
    assert!(reader.is_empty());
}

#[test]
fn test_file_reader_read_exact_several_blocks() {
    let blocks = make_block_device(LOREM);
    let mut reader = FileReader::<_, _, BLOCK_SIZE>::new_in_array(blocks.as_slice(), LOREM.len());

    let mut buf = vec![0_u8; LOREM.len()];
    reader.read_exact(&mut buf).unwrap();

    assert_eq!(LOREM, String::from_utf8_lossy(&buf));
}

#[test]
fn test_file_reader_read_parts() {
    let blocks = make_block_device(LOREM);

    for part_len in [1, 3, BLOCK_SIZE, BLOCK_SIZE + 4] {
        let mut reader =
            FileReader::<_, _, BLOCK_SIZE>::new(blocks.as_slice(), LOREM.len(), vec![0; 64]);
        let out = read_in_parts(&mut reader, part_len);
        assert_eq!(LOREM, String::from_utf8_lossy(&out), "part length {part_len}");
    }
}

#[test]
fn test_file_reader_reads_past_end() {
    let s = "hello world";
    let blocks = make_block_device(s);
    let mut reader = FileReader::<_, _, BLOCK_SIZE>::new_in_array(blocks.as_slice(), s.len());

    let mut buf = vec![0_u8; s.len() + 1];
    assert!(reader.read_exact(&mut buf).is_err());
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_file_reader_seek_into_middle_of_block() {
    let blocks = make_block_device(LOREM);
    let mut reader = FileReader::<_, _, BLOCK_SIZE>::new_in_array(blocks.as_slice(), LOREM.len());

    // Load the block holding the position first.
    let mut buf = [0_u8; 4];
    reader.seek(SeekFrom::Start(40)).unwrap();
    reader.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, &LOREM.as_bytes()[40..44]);

    // Seek backwards into the previous block and read across its boundary.
    assert_eq!(reader.seek(SeekFrom::Current(-30)).unwrap(), 14);
    let mut buf = [0_u8; 40];
    reader.read_exact(&mut buf).unwrap();
    assert_eq!(&buf[..], &LOREM.as_bytes()[14..54]);

    // Seek close to the end of file, the tail is shorter than a block.
    assert_eq!(reader.seek(SeekFrom::End(-5)).unwrap() as usize, LOREM.len() - 5);
    assert_eq!(reader.bytes_remaining(), 5);
    let out = read_in_parts(&mut reader, 16);
    assert_eq!(&out[..], &LOREM.as_bytes()[LOREM.len() - 5..]);
}

#[test]
fn test_file_reader_rewind() {
    let blocks = make_block_device(LOREM);
    let mut reader = FileReader::<_, _, BLOCK_SIZE>::new_in_array(blocks.as_slice(), LOREM.len());

    let first = read_in_parts(&mut reader, 7);
    reader.rewind().unwrap();
    let second = read_in_parts(&mut reader, 7);
    assert_eq!(first, second);
}

#[test]
fn test_file_reader_invalid_seek() {
    let s = "hello world";
    let blocks = make_block_device(s);
    let mut reader = FileReader::<_, _, BLOCK_SIZE>::new_in_array(blocks.as_slice(), s.len());

    assert_eq!(reader.seek(SeekFrom::Start(100)), Err(FileError::InvalidSeek));
    assert_eq!(reader.seek(SeekFrom::Current(-1)), Err(FileError::InvalidSeek));
    assert_eq!(reader.seek(SeekFrom::End(1)), Err(FileError::InvalidSeek));
    // The end of file itself is a valid position.
    assert_eq!(reader.seek(SeekFrom::End(0)).unwrap() as usize, s.len());
    assert!(reader.is_empty());
}
