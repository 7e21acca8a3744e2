/*
    Femto86
    https://github.com/femto86/femto86

    Copyright 2024-2025 Femto86 Contributors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    ---------------------------------------------------------------------------

    memerror.rs

    Defines the Memory Error enum.

*/

use core::fmt::Display;
use std::error::Error;

#[derive(Debug)]
pub enum MemError {
    NotReadable,
    NotWritable,
    SizeMismatch { expected: usize, got: usize },
    FileReadError,
}

impl Error for MemError {}
impl Display for MemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            MemError::NotReadable => {
                write!(f, "An attempt was made to read a non-readable memory area.")
            }
            MemError::NotWritable => {
                write!(f, "An attempt was made to write a non-writable memory area.")
            }
            MemError::SizeMismatch { expected, got } => {
                write!(f, "Image size mismatch: expected {} bytes, got {}.", expected, got)
            }
            MemError::FileReadError => write!(f, "Error reading image file into memory area."),
        }
    }
}
